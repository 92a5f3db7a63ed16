use chrono::Utc;
use serde::Serialize;
use service_core::error::AppError;
use sqlx::{Postgres, QueryBuilder};
use tracing::{info, instrument};

use crate::dtos::students::{CreatedStudent, SortOrder, StudentListQuery, StudentRequest, StudentSort};
use crate::models::Student;
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::procedure::{ProcedureCall, SuccessRule};
use crate::services::Database;
use crate::utils::validation::non_blank;
use crate::utils::{PageMeta, PageRequest};

const STUDENT_COLUMNS: &str = r#"
    SELECT carne AS code,
           nombres AS first_names,
           apellidos AS last_names,
           nombres || ' ' || apellidos AS full_name,
           carrera AS program,
           fecha_nac AS birth_date,
           correo AS email,
           telefono AS phone,
           fecha_registro AS registered_at
    FROM seg.tb_estudiante
    WHERE 1=1"#;

/// Effective list filters, echoed back to the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentFilters {
    pub search: Option<String>,
    pub program: Option<String>,
    pub sort_by: StudentSort,
    pub sort_order: SortOrder,
}

impl From<&StudentListQuery> for StudentFilters {
    fn from(query: &StudentListQuery) -> Self {
        Self {
            search: non_blank(query.search.as_deref()),
            program: non_blank(query.program.as_deref()),
            sort_by: StudentSort::parse(query.sort_by.as_deref()),
            sort_order: SortOrder::parse(query.sort_order.as_deref()),
        }
    }
}

#[derive(Debug)]
pub struct StudentPage {
    pub students: Vec<Student>,
    pub pagination: PageMeta,
    pub filters: StudentFilters,
}

fn push_student_filters(builder: &mut QueryBuilder<'_, Postgres>, filters: &StudentFilters) {
    if let Some(search) = &filters.search {
        let pattern = format!("%{}%", search);
        builder
            .push(" AND (nombres ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR apellidos ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR carne ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR (nombres || ' ' || apellidos) ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(program) = &filters.program {
        builder
            .push(" AND carrera ILIKE ")
            .push_bind(format!("%{}%", program));
    }
}

/// Which unique student field a duplicate check looks at.
#[derive(Debug, Clone, Copy)]
enum UniqueField {
    Email,
    Phone,
}

impl UniqueField {
    fn column(self) -> &'static str {
        match self {
            Self::Email => "correo",
            Self::Phone => "telefono",
        }
    }

    fn taken_message(self) -> &'static str {
        match self {
            Self::Email => "A student with this email already exists",
            Self::Phone => "A student with this phone number already exists",
        }
    }
}

fn duplicate_check<'a>(
    field: UniqueField,
    value: &'a str,
    except_code: Option<&'a str>,
) -> QueryBuilder<'a, Postgres> {
    let mut builder = QueryBuilder::new("SELECT EXISTS(SELECT 1 FROM seg.tb_estudiante WHERE ");
    builder.push(field.column()).push(" = ").push_bind(value);
    if let Some(code) = except_code {
        builder.push(" AND carne <> ").push_bind(code);
    }
    builder.push(")");
    builder
}

/// Without a birth date the procedure's own default applies.
fn insert_student_call<'a>(actor: &'a str, req: &'a StudentRequest) -> ProcedureCall<'a> {
    ProcedureCall::new("seg.sp_insertar_estudiante")
        .arg(actor)
        .arg(req.first_names.as_str())
        .arg(req.last_names.as_str())
        .arg(req.program.as_str())
        .arg(req.email.as_str())
        .arg(req.phone.as_str())
        .optional_arg(req.birth_date)
}

impl Database {
    async fn ensure_student_field_free(
        &self,
        field: UniqueField,
        value: &str,
        except_code: Option<&str>,
    ) -> Result<(), AppError> {
        let taken: bool = duplicate_check(field, value, except_code)
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to check student {}: {}", field.column(), e))
            })?;

        if taken {
            return Err(AppError::BadRequest(anyhow::anyhow!(field.taken_message())));
        }
        Ok(())
    }

    #[instrument(skip(self, req))]
    pub async fn create_student(
        &self,
        actor: &str,
        req: &StudentRequest,
    ) -> Result<(CreatedStudent, String), AppError> {
        let req = req.trimmed();
        self.ensure_student_field_free(UniqueField::Email, &req.email, None)
            .await?;
        self.ensure_student_field_free(UniqueField::Phone, &req.phone, None)
            .await?;

        let accepted = insert_student_call(actor, &req)
            .outcome(self.pool())
            .await?
            .into_result(SuccessRule::Zero, "Could not register the student")?;

        let code = accepted.text("carneGenerado").unwrap_or_default();
        info!(code = %code, "Student registered");

        let message = accepted.message_or("Student registered");
        Ok((
            CreatedStudent {
                code,
                first_names: req.first_names,
                last_names: req.last_names,
                email: req.email,
                program: req.program,
                registered_at: Utc::now(),
            },
            message,
        ))
    }

    #[instrument(skip(self, query))]
    pub async fn list_students(&self, query: &StudentListQuery) -> Result<StudentPage, AppError> {
        let page = PageRequest::clamp(query.page, query.limit, 10, 50);
        let filters = StudentFilters::from(query);

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM seg.tb_estudiante WHERE 1=1");
        push_student_filters(&mut count, &filters);

        let mut rows = QueryBuilder::new(STUDENT_COLUMNS);
        push_student_filters(&mut rows, &filters);
        rows.push(" ORDER BY ")
            .push(filters.sort_by.column())
            .push(" ")
            .push(filters.sort_order.keyword())
            .push(" LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let (students, total) = self.fetch_page("list_students", count, rows).await?;

        Ok(StudentPage {
            students,
            pagination: page.meta(total),
            filters,
        })
    }

    #[instrument(skip(self))]
    pub async fn get_student(&self, code: &str) -> Result<Student, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_student"])
            .start_timer();

        let mut builder = QueryBuilder::new(STUDENT_COLUMNS);
        builder.push(" AND carne = ").push_bind(code);
        let student = builder
            .build_query_as::<Student>()
            .fetch_optional(self.pool())
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get student: {}", e)))?;

        timer.observe_duration();

        student.ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Student not found")))
    }

    /// Distinct non-empty programs, alphabetically.
    #[instrument(skip(self))]
    pub async fn list_programs(&self) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT carrera
            FROM seg.tb_estudiante
            WHERE carrera IS NOT NULL AND carrera <> ''
            ORDER BY carrera
            "#,
        )
        .fetch_all(self.pool())
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list programs: {}", e)))
    }

    #[instrument(skip(self, req))]
    pub async fn update_student(
        &self,
        actor: &str,
        code: &str,
        req: &StudentRequest,
    ) -> Result<String, AppError> {
        let req = req.trimmed();
        self.ensure_student_field_free(UniqueField::Email, &req.email, Some(code))
            .await?;
        self.ensure_student_field_free(UniqueField::Phone, &req.phone, Some(code))
            .await?;

        let accepted = ProcedureCall::new("seg.sp_actualizar_estudiante")
            .arg(actor)
            .arg(code)
            .arg(req.first_names.as_str())
            .arg(req.last_names.as_str())
            .arg(req.program.as_str())
            .arg(req.email.as_str())
            .arg(req.phone.as_str())
            .arg(req.birth_date)
            .outcome(self.pool())
            .await?
            .into_result(SuccessRule::Zero, "Could not update the student")?;

        Ok(accepted.message_or("Student updated"))
    }

    #[instrument(skip(self))]
    pub async fn delete_student(&self, actor: &str, code: &str) -> Result<String, AppError> {
        let accepted = ProcedureCall::new("seg.sp_eliminar_estudiante")
            .arg(actor)
            .arg(code)
            .outcome(self.pool())
            .await?
            .into_result(SuccessRule::Zero, "Could not delete the student")?;

        Ok(accepted.message_or("Student deleted"))
    }
}
