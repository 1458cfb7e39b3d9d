use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

use crate::database::ModelError;
use crate::error::AppError;
use crate::handlers::{PageContext, PostForm};
use crate::session::{AUTHENTICATED_USER_ID, REDIRECT_PATH_AFTER_LOGIN};
use crate::state::AppState;
use crate::validator::{self, Validator, EMAIL_RX};

pub const MIN_PASSWORD_CHARS: usize = 8;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserSignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(skip_deserializing)]
    pub validator: Validator,
}

impl UserSignupForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(validator::not_blank(&self.name), "name", "This field cannot be blank");
        v.check_field(validator::not_blank(&self.email), "email", "This field cannot be blank");
        v.check_field(
            validator::matches(&self.email, &EMAIL_RX),
            "email",
            "This field must be a valid email address",
        );
        v.check_field(validator::not_blank(&self.password), "password", "This field cannot be blank");
        v.check_field(
            validator::min_chars(&self.password, MIN_PASSWORD_CHARS),
            "password",
            "This field must be at least 8 characters long",
        );
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UserLoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(skip_deserializing)]
    pub validator: Validator,
}

impl UserLoginForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(validator::not_blank(&self.email), "email", "This field cannot be blank");
        v.check_field(
            validator::matches(&self.email, &EMAIL_RX),
            "email",
            "This field must be a valid email address",
        );
        v.check_field(validator::not_blank(&self.password), "password", "This field cannot be blank");
    }
}

/// GET /user/signup
pub async fn user_signup(State(state): State<AppState>, page: PageContext) -> Result<Response, AppError> {
    let data = page.template_data().await?.with_form(&UserSignupForm::default());
    state.render(StatusCode::OK, "signup.html", &data)
}

/// POST /user/signup
pub async fn user_signup_post(
    State(state): State<AppState>,
    page: PageContext,
    PostForm(mut form): PostForm<UserSignupForm>,
) -> Result<Response, AppError> {
    form.validate();

    if form.validator.valid() {
        match state.users.insert(&form.name, &form.email, &form.password).await {
            Ok(()) => {
                tracing::info!(email = %form.email, "user signed up");
                page.flash("Your signup was successful. Please log in.").await?;
                return Ok(Redirect::to("/user/login").into_response());
            }
            Err(ModelError::DuplicateEmail) => {
                form.validator.add_field_error("email", "Email address already in use");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let data = page.template_data().await?.with_form(&form);
    state.render(StatusCode::UNPROCESSABLE_ENTITY, "signup.html", &data)
}

/// GET /user/login
pub async fn user_login(State(state): State<AppState>, page: PageContext) -> Result<Response, AppError> {
    let data = page.template_data().await?.with_form(&UserLoginForm::default());
    state.render(StatusCode::OK, "login.html", &data)
}

/// POST /user/login - on success the session id is rotated before the user id
/// is stored, then the user is sent back to where the login gate stopped them.
pub async fn user_login_post(
    State(state): State<AppState>,
    page: PageContext,
    PostForm(mut form): PostForm<UserLoginForm>,
) -> Result<Response, AppError> {
    form.validate();

    if form.validator.valid() {
        match state.users.authenticate(&form.email, &form.password).await {
            Ok(id) => {
                page.session.cycle_id().await?;
                page.session.insert(AUTHENTICATED_USER_ID, id).await?;

                let target = page
                    .session
                    .remove::<String>(REDIRECT_PATH_AFTER_LOGIN)
                    .await?
                    .unwrap_or_else(|| "/snippet/create".to_string());
                tracing::info!(user_id = id, "user logged in");
                return Ok(Redirect::to(&target).into_response());
            }
            Err(ModelError::InvalidCredentials) => {
                form.validator.add_non_field_error("Email or password is incorrect");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let data = page.template_data().await?.with_form(&form);
    state.render(StatusCode::UNPROCESSABLE_ENTITY, "login.html", &data)
}
