use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::handlers::{PageContext, PostForm};
use crate::state::AppState;
use crate::validator::{self, Validator};

pub const MAX_TITLE_CHARS: usize = 100;
/// Lifetimes offered by the create form, in days
pub const PERMITTED_EXPIRES: [i32; 3] = [1, 7, 365];

#[derive(Debug, Deserialize, Serialize)]
pub struct SnippetCreateForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub expires: i32,
    #[serde(skip_deserializing)]
    pub validator: Validator,
}

impl Default for SnippetCreateForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: 365,
            validator: Validator::new(),
        }
    }
}

impl SnippetCreateForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(validator::not_blank(&self.title), "title", "This field cannot be blank");
        v.check_field(
            validator::max_chars(&self.title, MAX_TITLE_CHARS),
            "title",
            "This field cannot be more than 100 characters long",
        );
        v.check_field(validator::not_blank(&self.content), "content", "This field cannot be blank");
        v.check_field(
            validator::permitted_value(&self.expires, &PERMITTED_EXPIRES),
            "expires",
            "This field must equal 1, 7 or 365",
        );
    }
}

/// GET /snippet/create
pub async fn snippet_create(State(state): State<AppState>, page: PageContext) -> Result<Response, AppError> {
    let data = page.template_data().await?.with_form(&SnippetCreateForm::default());
    state.render(StatusCode::OK, "create.html", &data)
}

/// POST /snippet/create
pub async fn snippet_create_post(
    State(state): State<AppState>,
    page: PageContext,
    PostForm(mut form): PostForm<SnippetCreateForm>,
) -> Result<Response, AppError> {
    form.validate();

    if !form.validator.valid() {
        let data = page.template_data().await?.with_form(&form);
        return state.render(StatusCode::UNPROCESSABLE_ENTITY, "create.html", &data);
    }

    let id = state
        .snippets
        .insert(&form.title, &form.content, form.expires)
        .await?;

    page.flash("Snippet successfully created!").await?;
    Ok(Redirect::to(&format!("/snippet/view/{id}")).into_response())
}
