// src/common/db_utils.rs

use crate::common::error::AppError;

// ---
// Tradução de erros do Postgres
// ---
/// Converte violação de chave única no código de conflito informado.
/// Qualquer outro erro segue como `DatabaseError`.
pub(crate) fn unique_violation_as(code: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return AppError::UniqueConstraintViolation(code);
            }
        }
        e.into()
    }
}

/// Violação de CHECK vira erro de validação no campo informado.
pub(crate) fn check_violation_as(field: &'static str, code: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_check_violation() {
                return AppError::field(field, code);
            }
        }
        e.into()
    }
}

/// `fetch_optional` + `NotFound` para a entidade.
pub(crate) fn found<T>(row: Option<T>, entity: &'static str) -> Result<T, AppError> {
    row.ok_or(AppError::NotFound(entity))
}

/// Erro de banco simulado para testar o mapeamento de constraints.
#[cfg(test)]
pub(crate) mod test_support {
    use std::{error::Error as StdError, fmt};

    use sqlx::error::{DatabaseError, ErrorKind};

    #[derive(Debug)]
    struct FakeDbError(ErrorKind);

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "erro simulado: {:?}", self.0)
        }
    }

    impl StdError for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &str {
            "erro simulado"
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            match self.0 {
                ErrorKind::UniqueViolation => ErrorKind::UniqueViolation,
                ErrorKind::ForeignKeyViolation => ErrorKind::ForeignKeyViolation,
                ErrorKind::NotNullViolation => ErrorKind::NotNullViolation,
                ErrorKind::CheckViolation => ErrorKind::CheckViolation,
                _ => ErrorKind::Other,
            }
        }
    }

    pub(crate) fn db_error(kind: ErrorKind) -> sqlx::Error {
        sqlx::Error::Database(Box::new(FakeDbError(kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::test_support::db_error;
    use sqlx::error::ErrorKind;

    #[test]
    fn non_database_errors_pass_through() {
        let mapped = unique_violation_as("contact_phone_taken")(sqlx::Error::RowNotFound);
        assert!(matches!(mapped, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }

    #[test]
    fn unique_violation_becomes_conflict_code() {
        let mapped = unique_violation_as("credit_already_awarded")(db_error(ErrorKind::UniqueViolation));
        assert!(matches!(mapped, AppError::UniqueConstraintViolation("credit_already_awarded")));

        let other = unique_violation_as("credit_already_awarded")(db_error(ErrorKind::CheckViolation));
        assert!(matches!(other, AppError::DatabaseError(_)));
    }

    #[test]
    fn check_violation_becomes_field_error() {
        match check_violation_as("amount", "negative_balance")(db_error(ErrorKind::CheckViolation)) {
            AppError::FieldValidationError(fields) => {
                assert_eq!(fields.get("amount").map(String::as_str), Some("negative_balance"));
            }
            other => panic!("erro inesperado: {:?}", other),
        }

        let other = check_violation_as("amount", "negative_balance")(db_error(ErrorKind::UniqueViolation));
        assert!(matches!(other, AppError::DatabaseError(_)));
    }

    #[test]
    fn missing_row_is_not_found() {
        let err = found::<u8>(None, "lead").unwrap_err();
        assert!(matches!(err, AppError::NotFound("lead")));
        assert_eq!(found(Some(7), "lead").unwrap(), 7);
    }
}
