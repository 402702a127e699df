use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Form;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use maud::{Markup, html};
use tracing::{error, info};

use crate::config::{HOME_PATH, SIGN_IN_PATH};
use crate::forms::{Field, LoginForm, RegisterForm, ValidationErrors};
use crate::state::AppState;
use crate::styles::Forms as FormClass;

use super::page_shell;

const REGISTER_FAILED: &str = "This login is already taken or another error occurred";
const LOGIN_FAILED: &str = "Invalid login or password";

pub async fn register_page() -> Markup {
    render_register(&RegisterForm::default(), None, None)
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Response {
    if let Err(errors) = form.validate() {
        return render_register(&form, Some(&errors), None).into_response();
    }

    match sign_up(&state, &form).await {
        Ok(()) => Redirect::to(HOME_PATH).into_response(),
        Err(e) => {
            error!("Error during registration: {e:#}");
            render_register(&form, None, Some(REGISTER_FAILED)).into_response()
        }
    }
}

/// Registers, then signs in with the same credentials.
async fn sign_up(state: &AppState, form: &RegisterForm) -> Result<()> {
    state
        .backend
        .register(&form.username, &form.password, &form.full_name)
        .await
        .context("registration rejected")?;
    info!(username = %form.username, "Registration successful");
    sign_in(state, &form.username, &form.password).await
}

pub async fn login_page() -> Markup {
    render_login(&LoginForm::default(), None, None)
}

pub async fn login(State(state): State<Arc<AppState>>, Form(form): Form<LoginForm>) -> Response {
    if let Err(errors) = form.validate() {
        return render_login(&form, Some(&errors), None).into_response();
    }

    match sign_in(&state, &form.username, &form.password).await {
        Ok(()) => Redirect::to(HOME_PATH).into_response(),
        Err(e) => {
            error!("Error during login: {e:#}");
            render_login(&form, None, Some(LOGIN_FAILED)).into_response()
        }
    }
}

async fn sign_in(state: &AppState, username: &str, password: &str) -> Result<()> {
    let token = state
        .backend
        .login(username, password)
        .await
        .context("login rejected")?;
    state
        .session
        .sign_in(&token)
        .context("failed to store session token")?;
    info!(username, "Login successful");
    Ok(())
}

pub async fn logout(State(state): State<Arc<AppState>>) -> Redirect {
    if let Err(e) = state.session.sign_out() {
        error!("failed to erase session token: {e}");
    }
    Redirect::to(SIGN_IN_PATH)
}

fn render_register(
    form: &RegisterForm,
    errors: Option<&ValidationErrors>,
    failure: Option<&str>,
) -> Markup {
    let message = failure.or(errors.and_then(|e| e.summary));
    let content = html! {
        div.(FormClass::AUTH_BOX) {
            h2 { "Registration" }
            form method="post" action="/register" {
                (text_input("username", "Login:", "text", &form.username, Field::Username, errors))
                (text_input("password", "Password:", "password", "", Field::Password, errors))
                (text_input(
                    "full_name", "Full name:", "text", &form.full_name, Field::FullName, errors
                ))
                @if let Some(message) = message {
                    p.(FormClass::ERROR_MESSAGE) { (message) }
                }
                button.(FormClass::SUBMIT_BUTTON) type="submit" { "Sign up" }
            }
            p {
                "Already have an account? "
                a href=(SIGN_IN_PATH) { "Log in" }
            }
        }
    };
    page_shell("Registration | URL Shortener", content)
}

fn render_login(
    form: &LoginForm,
    errors: Option<&ValidationErrors>,
    failure: Option<&str>,
) -> Markup {
    let content = html! {
        div.(FormClass::AUTH_BOX) {
            h2 { "Authorization" }
            form method="post" action="/login" {
                (text_input("username", "Login", "text", &form.username, Field::Username, errors))
                (text_input("password", "Password", "password", "", Field::Password, errors))
                @if let Some(message) = failure {
                    div.(FormClass::ERROR_MESSAGE) { (message) }
                }
                button.(FormClass::SUBMIT_BUTTON) type="submit" { "Log in" }
            }
            p {
                "Don't have an account? "
                a href="/register" { "Sign up" }
            }
        }
    };
    page_shell("Log in | URL Shortener", content)
}

fn text_input(
    name: &str,
    label: &str,
    kind: &str,
    value: &str,
    field: Field,
    errors: Option<&ValidationErrors>,
) -> Markup {
    let problem = errors.and_then(|e| e.for_field(field));
    html! {
        div.(FormClass::FORM_GROUP) {
            label for=(name) { (label) }
            input id=(name) name=(name) type=(kind) value=(value)
                class=[problem.map(|_| FormClass::FIELD_ERROR)];
            @if let Some(problem) = problem {
                span.(FormClass::FIELD_MESSAGE) { (problem) }
            }
        }
    }
}
