use std::collections::HashMap;

use anyhow::Context as _;
use axum::response::Html;
use tera::{Context, Tera, Value};
use tower_sessions::Session;

use crate::{
    auth::{csrf, current_username},
    error::AppError,
    flash, urls,
};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("register.html", include_str!("../templates/register.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("user.html", include_str!("../templates/user.html")),
    ("feedback_form.html", include_str!("../templates/feedback_form.html")),
];

/// Compiled page templates, embedded in the binary.
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn load() -> anyhow::Result<Self> {
        let mut tera = Tera::default();
        tera.register_filter("path_segment", path_segment);
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .context("parse templates")?;
        Ok(Self { tera })
    }

    /// Renders `name`, adding pending flashes and the logged-in username.
    pub async fn page(
        &self,
        session: &Session,
        name: &str,
        mut ctx: Context,
    ) -> Result<Html<String>, AppError> {
        ctx.insert("flashes", &flash::take(session).await?);
        ctx.insert("current_user", &current_username(session).await?);
        Ok(Html(self.tera.render(name, &ctx)?))
    }

    /// Same as [`Views::page`] with the session's CSRF token in `csrf_token`.
    pub async fn form(
        &self,
        session: &Session,
        name: &str,
        mut ctx: Context,
    ) -> Result<Html<String>, AppError> {
        ctx.insert("csrf_token", &csrf::token(session).await?);
        self.page(session, name, ctx).await
    }
}

/// `{{ name | path_segment }}` for usernames placed inside an href or action.
fn path_segment(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("path_segment expects a string"))?;
    Ok(Value::String(urls::segment(raw)))
}
