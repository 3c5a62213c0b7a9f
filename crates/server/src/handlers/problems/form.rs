use db::{direction, problem, ConnectionTrait, DbErr, EntityTrait, QuerySelect, SelectExt};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{form::MultipartForm, validation::field_error};

/// Problem form fields.
#[derive(Validate)]
pub(crate) struct ProblemForm {
    #[validate(length(min = 1, max = "problem::TITLE_MAX_LENGTH"))]
    pub title: String,

    #[validate(length(min = 1, max = "problem::DESCRIPTION_MAX_LENGTH"))]
    pub description: String,

    pub direction: i64,
}

impl ProblemForm {
    /// Collect and validate problem form fields.
    pub fn from_multipart(form: &mut MultipartForm) -> Result<Self, ValidationErrors> {
        let direction = form
            .take("direction")
            .and_then(|value| value.parse::<i64>().ok());

        let problem_form = ProblemForm {
            title: form.take("title").unwrap_or_default(),
            description: form.take("description").unwrap_or_default(),
            direction: direction.unwrap_or_default(),
        };

        let mut errors = problem_form
            .validate()
            .err()
            .unwrap_or_else(ValidationErrors::new);

        if direction.is_none() {
            errors.add("direction", ValidationError::new("required"));
        }

        if errors.errors().is_empty() {
            Ok(problem_form)
        } else {
            Err(errors)
        }
    }

    /// Check that the selected direction exists.
    pub async fn check_direction<C, E>(&self, db: &C) -> Result<(), E>
    where
        C: ConnectionTrait + Send,
        E: From<DbErr> + From<ValidationErrors>,
    {
        let exists = direction::Entity::find_by_id(self.direction)
            .select_only()
            .exists(db)
            .await?;

        if exists {
            Ok(())
        } else {
            Err(field_error("direction", "invalid_choice", "select a valid direction").into())
        }
    }
}
