use rand::{distributions::Alphanumeric, Rng};

const CODE_STEM_LEN: usize = 8;
const CODE_SUFFIX_LEN: usize = 4;

/// Product code from a name: `COCA-COL-7QX2` for "Coca Cola 600ml".
pub fn product_code(name: &str) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .map(|b| (b as char).to_ascii_uppercase())
        .take(CODE_SUFFIX_LEN)
        .collect();
    format!("{}-{}", code_stem(name), suffix)
}

/// Uppercased name with runs of other characters collapsed to `-`, cut to eight characters.
///
/// The cut happens after edge dashes are dropped, so a stem may still end on one.
pub fn code_stem(name: &str) -> String {
    let mut stem = String::new();
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_uppercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !stem.is_empty() {
                stem.push('-');
            }
            pending_dash = false;
            stem.push(c);
        } else {
            pending_dash = true;
        }
    }

    if stem.is_empty() {
        return "PRD".to_string();
    }
    stem.chars().take(CODE_STEM_LEN).collect()
}

/// First three characters of the first names and of the last name, lowercased, with whitespace
/// removed after the cut: `"  Ana"` contributes only `a`.
pub fn username_for(first_names: &str, last_name: &str) -> String {
    let head = |s: &str| -> String { s.chars().take(3).collect() };
    format!("{}{}", head(first_names), head(last_name))
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_collapses_separators() {
        assert_eq!(code_stem("Coca  Cola 600ml"), "COCA-COL");
        assert_eq!(code_stem("--pan--"), "PAN");
        assert_eq!(code_stem("A/B"), "A-B");
    }

    #[test]
    fn stem_falls_back_when_nothing_is_left() {
        assert_eq!(code_stem("¡¿!?"), "PRD");
        assert_eq!(code_stem(""), "PRD");
    }

    #[test]
    fn stem_is_cut_after_trimming() {
        assert_eq!(code_stem("abcdefg hij"), "ABCDEFG-");
        assert_eq!(code_stem("  yogur  "), "YOGUR");
    }

    #[test]
    fn generated_code_has_a_random_suffix() {
        let code = product_code("Leche entera");
        let (stem, suffix) = code.rsplit_once('-').unwrap();
        assert_eq!(stem, "LECHE-EN");
        assert_eq!(suffix.len(), 4);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn username_takes_three_and_three() {
        assert_eq!(username_for("María José", "López"), "marlóp");
        assert_eq!(username_for("Al", "Ng"), "alng");
        assert_eq!(username_for("Jo Ann", "Smith"), "josmi");
    }

    #[test]
    fn username_cuts_before_dropping_whitespace() {
        assert_eq!(username_for("  Ana", "Ruiz"), "arui");
        assert_eq!(username_for("Luis", " Pérez"), "luipe");
    }
}
