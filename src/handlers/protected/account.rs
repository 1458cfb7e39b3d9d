use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

use crate::database::ModelError;
use crate::error::AppError;
use crate::handlers::public::user::MIN_PASSWORD_CHARS;
use crate::handlers::{PageContext, PostForm};
use crate::state::AppState;
use crate::validator::{self, Validator};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PasswordUpdateForm {
    #[serde(default, skip_serializing)]
    pub current_password: String,
    #[serde(default, skip_serializing)]
    pub new_password: String,
    #[serde(default, skip_serializing, alias = "confirm_new_password")]
    pub new_password_confirmation: String,
    #[serde(skip_deserializing)]
    pub validator: Validator,
}

impl PasswordUpdateForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(
            validator::not_blank(&self.current_password),
            "current_password",
            "This field cannot be blank",
        );
        v.check_field(validator::not_blank(&self.new_password), "new_password", "This field cannot be blank");
        v.check_field(
            validator::min_chars(&self.new_password, MIN_PASSWORD_CHARS),
            "new_password",
            "This field must be at least 8 characters long",
        );
        v.check_field(
            validator::not_blank(&self.new_password_confirmation),
            "new_password_confirmation",
            "This field cannot be blank",
        );
        v.check_field(
            self.new_password == self.new_password_confirmation,
            "new_password_confirmation",
            "Passwords do not match",
        );
    }
}

/// GET /account/view
pub async fn account_view(State(state): State<AppState>, page: PageContext) -> Result<Response, AppError> {
    let Some(user_id) = page.auth.user_id else {
        return Ok(Redirect::to("/user/login").into_response());
    };

    let user = match state.users.get(user_id).await {
        Ok(user) => user,
        Err(ModelError::NotFound) => return Ok(Redirect::to("/user/login").into_response()),
        Err(e) => return Err(e.into()),
    };

    let mut data = page.template_data().await?;
    data.user = Some(user);
    state.render(StatusCode::OK, "account.html", &data)
}

/// GET /account/password/update
pub async fn account_password_update(
    State(state): State<AppState>,
    page: PageContext,
) -> Result<Response, AppError> {
    let data = page.template_data().await?.with_form(&PasswordUpdateForm::default());
    state.render(StatusCode::OK, "password.html", &data)
}

/// POST /account/password/update
pub async fn account_password_update_post(
    State(state): State<AppState>,
    page: PageContext,
    PostForm(mut form): PostForm<PasswordUpdateForm>,
) -> Result<Response, AppError> {
    let Some(user_id) = page.auth.user_id else {
        return Ok(Redirect::to("/user/login").into_response());
    };

    form.validate();

    if form.validator.valid() {
        match state
            .users
            .compare_and_update_password(user_id, &form.current_password, &form.new_password)
            .await
        {
            Ok(()) => {
                tracing::info!(user_id, "password updated");
                page.flash("Your password has been updated!").await?;
                return Ok(Redirect::to("/account/view").into_response());
            }
            Err(ModelError::InvalidCredentials) => {
                form.validator
                    .add_field_error("current_password", "Current password is incorrect");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let data = page.template_data().await?.with_form(&form);
    state.render(StatusCode::UNPROCESSABLE_ENTITY, "password.html", &data)
}
