use crate::auth::sessions::{clear_session_cookie, read_session_cookie, session_cookie};
use crate::auth::{AuthError, TokenSource};
use crate::domain::swipe::{Commit, Direction};
use crate::domain::{DealStatus, SortKey, ViewMode};
use crate::errors::ServerError;
use crate::forms::config_form::EditorOp;
use crate::forms::{ConfigForm, FieldErrors};
use crate::responses::{asset_response, html_response, redirect, redirect_with_cookie, ResultResp};
use crate::state::deals::Tab;
use crate::state::{lock, now_unix, App, UserSession};
use crate::templates::pages;
use astra::Request;
use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info};

type Params = HashMap<String, String>;

pub fn handle(req: Request, app: &App) -> ResultResp {
    let method = req.method().as_str().to_owned();
    let path = req.uri().path().to_owned();
    let query = parse_query(&req);
    let raw_token = req
        .headers()
        .get("Cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(read_session_cookie)
        .map(str::to_owned);
    let body = read_body(req)?;

    debug!(%method, %path, "request");

    // Routes that work without a session.
    match (method.as_str(), path.as_str()) {
        ("GET", "/static/swipe.js") => {
            return asset_response(include_str!("../static/swipe.js"), mime::APPLICATION_JAVASCRIPT_UTF_8)
        }
        ("GET", "/static/main.css") => {
            return asset_response(include_str!("../static/main.css"), mime::TEXT_CSS_UTF_8)
        }
        ("GET", "/login") => {
            if current_session(app, raw_token.as_deref()).is_some() {
                return redirect("/discover");
            }
            return html_response(pages::login_page("", None));
        }
        ("POST", "/login") => return login(app, &parse_form(&body)),
        ("POST", "/logout") => {
            if let Some(raw) = raw_token.as_deref() {
                app.sign_out(raw);
            }
            return redirect_with_cookie("/login", &clear_session_cookie());
        }
        _ => {}
    }

    let Some(session) = current_session(app, raw_token.as_deref()) else {
        return redirect("/login");
    };
    let form = parse_form(&body);

    match (method.as_str(), path.as_str()) {
        ("GET", "/") => redirect("/discover"),

        // -- discover -----------------------------------------------------------
        ("GET", "/discover") => discover(app, &session, &query),
        ("POST", "/discover/refresh") => refresh(app, &session),
        ("POST", "/discover/swipe") => {
            let id = int_param(&form, "id")?;
            let dx: f64 = param(&form, "dx")?
                .parse()
                .map_err(|_| ServerError::BadRequest("dx must be a number".into()))?;
            let commit = {
                let mut deals = lock(&session.deals);
                deals.swipe(id, dx);
                deals.finish_swipe()
            };
            dispatch(app, &session, commit);
            redirect("/discover")
        }
        ("POST", "/discover/force") => {
            let dir = Direction::parse(param(&form, "dir")?)
                .ok_or_else(|| ServerError::BadRequest("dir must be left or right".into()))?;
            let commit = {
                let mut deals = lock(&session.deals);
                deals.force_swipe(dir);
                deals.finish_swipe()
            };
            dispatch(app, &session, commit);
            redirect("/discover")
        }
        ("POST", "/discover/action") => {
            let id = int_param(&form, "id")?;
            let status = terminal_status(param(&form, "status")?)?;
            let commit = {
                let mut deals = lock(&session.deals);
                // A repeated post for a deal already acted on is a no-op.
                deals
                    .contains(id)
                    .then(|| deals.apply_terminal_action(id, status))
            };
            dispatch(app, &session, commit);
            redirect("/discover")
        }
        ("GET", "/discover/detail") => {
            let id = int_param(&query, "id")?;
            if !lock(&session.deals).open_detail(id) {
                return Err(ServerError::NotFound);
            }
            render_discover(&session, None)
        }
        ("POST", "/discover/detail/save") => detail_action(app, &session, DealStatus::Saved),
        ("POST", "/discover/detail/reject") => detail_action(app, &session, DealStatus::Deleted),
        ("POST", "/discover/detail/close") => {
            lock(&session.deals).close_detail();
            redirect("/discover")
        }

        // -- saved --------------------------------------------------------------
        ("GET", "/saved") => {
            let mut deals = lock(&session.deals);
            deals.switch_tab(Tab::Saved);
            let load_error = deals
                .load_saved(app.store.as_ref(), session.as_ref())
                .err()
                .map(|e| e.to_string());
            let failed = session.commits.failed();
            html_response(pages::saved_page(&deals, &failed, load_error.as_deref()))
        }
        ("POST", "/saved/delete") => {
            let id = int_param(&form, "id")?;
            lock(&session.deals).request_delete(id);
            redirect("/saved")
        }
        ("POST", "/saved/delete/cancel") => {
            lock(&session.deals).cancel_delete();
            redirect("/saved")
        }
        ("POST", "/saved/delete/confirm") => {
            let commit = lock(&session.deals).confirm_delete();
            if let Some(commit) = commit {
                // Failures land in the commit queue and show up as a notice.
                if let Ok(false) =
                    session
                        .commits
                        .run_now(app.store.as_ref(), session.as_ref(), commit)
                {
                    info!(deal_id = commit.deal_id, "delete skipped, deal still being saved");
                }
            }
            redirect("/saved")
        }

        ("POST", "/commits/retry") => {
            let retried = session
                .commits
                .retry_failed(Arc::clone(&app.store), session.bearer());
            info!(count = retried.len(), "retrying failed commits");
            let back = match form.get("back").map(String::as_str) {
                Some("/saved") => "/saved",
                _ => "/discover",
            };
            redirect(back)
        }

        // -- configuration ------------------------------------------------------
        ("GET", "/config") => {
            let mut config = lock(&session.config);
            config.load_active(app.config_api.as_ref(), session.as_ref());
            render_config(&mut config)
        }
        ("GET", "/config/history") => {
            let mut config = lock(&session.config);
            if config.active_version().is_none() {
                config.load_active(app.config_api.as_ref(), session.as_ref());
            }
            config.load_version_list(app.config_api.as_ref(), session.as_ref());
            render_config(&mut config)
        }
        ("GET", "/config/version") => {
            let version = int_param(&query, "v")?;
            let mut config = lock(&session.config);
            if config.active_version().is_none() {
                config.load_active(app.config_api.as_ref(), session.as_ref());
            }
            config.preview_version(app.config_api.as_ref(), session.as_ref(), version);
            render_config(&mut config)
        }
        ("POST", "/config/activate") => {
            let version = int_param(&form, "version")?;
            let activated = lock(&session.config).activate_version(
                app.config_api.as_ref(),
                session.as_ref(),
                version,
            );
            if activated {
                redirect("/config")
            } else {
                redirect(&format!("/config/version?v={version}"))
            }
        }
        ("GET", "/config/editor") => {
            let mut config = lock(&session.config);
            if config.active_version().is_none() {
                config.load_active(app.config_api.as_ref(), session.as_ref());
            }
            config.edit();
            render_config(&mut config)
        }
        ("POST", "/config/editor") => {
            let (mut editor, op) = ConfigForm::from_urlencoded(&body);
            // The config lock is held across the POST so writes from one
            // browser never overlap.
            let mut config = lock(&session.config);
            if op != EditorOp::Save {
                editor.apply(op);
                config.show_editor(editor, FieldErrors::new());
                return render_config(&mut config);
            }
            match config.create_config(app.config_api.as_ref(), session.as_ref(), editor) {
                Some(_) => redirect("/config"),
                None => render_config(&mut config),
            }
        }
        ("POST", "/config/editor/cancel") => {
            let mut config = lock(&session.config);
            config.cancel_edit(app.config_api.as_ref(), session.as_ref());
            render_config(&mut config)
        }
        ("GET", "/config/refresh") => {
            let mut config = lock(&session.config);
            config.refresh(app.config_api.as_ref(), session.as_ref());
            render_config(&mut config)
        }

        _ => Err(ServerError::NotFound),
    }
}

fn current_session(app: &App, raw_token: Option<&str>) -> Option<Arc<UserSession>> {
    app.session(raw_token?, now_unix())
}

fn login(app: &App, form: &Params) -> ResultResp {
    let email = form.get("email").map(String::as_str).unwrap_or("");
    let password = form.get("password").map(String::as_str).unwrap_or("");
    if email.trim().is_empty() || password.is_empty() {
        return html_response(pages::login_page(email, Some("Email and password are required.")));
    }

    match app.sign_in(email, password, now_unix()) {
        Ok(token) => redirect_with_cookie("/discover", &session_cookie(&token)),
        Err(AuthError::InvalidCredentials(msg)) => {
            html_response(pages::login_page(email, Some(&msg)))
        }
        Err(e) => html_response(pages::login_page(
            email,
            Some(&format!("Sign-in is unavailable right now: {e}")),
        )),
    }
}

fn discover(app: &App, session: &UserSession, query: &Params) -> ResultResp {
    let mut deals = lock(&session.deals);
    let first_visit = deals.switch_tab(Tab::Discover);
    if let Some(view) = query.get("view").and_then(|v| ViewMode::parse(v)) {
        deals.set_view(view);
    }

    let sort = query.get("sort").and_then(|s| SortKey::parse(s));
    let mut rng = rand::thread_rng();
    let result = match sort {
        Some(sort) => deals.change_sort(app.store.as_ref(), session, sort, &mut rng),
        None if first_visit => {
            let sort = deals.sort();
            deals.load(app.store.as_ref(), session, DealStatus::New, sort, &mut rng)
        }
        None => Ok(()),
    };
    let load_error = result.err().map(|e| e.to_string());
    let failed = session.commits.failed();
    html_response(pages::discover_page(&deals, &failed, load_error.as_deref()))
}

fn refresh(app: &App, session: &UserSession) -> ResultResp {
    let result = lock(&session.deals).refresh(app.store.as_ref(), session, &mut rand::thread_rng());
    match result {
        Ok(_) => redirect("/discover"),
        Err(e) => render_discover(session, Some(&e.to_string())),
    }
}

fn detail_action(app: &App, session: &UserSession, status: DealStatus) -> ResultResp {
    let commit = lock(&session.deals).detail_action(status);
    dispatch(app, session, commit);
    redirect("/discover")
}

fn render_discover(session: &UserSession, load_error: Option<&str>) -> ResultResp {
    let deals = lock(&session.deals);
    let failed = session.commits.failed();
    html_response(pages::discover_page(&deals, &failed, load_error))
}

fn render_config(config: &mut crate::state::ConfigState) -> ResultResp {
    let toast = config.take_toast();
    html_response(pages::config_page(config.page(), config.view(), toast.as_ref()))
}

/// Sends a status change in the background; the list has already moved on.
fn dispatch(app: &App, session: &UserSession, commit: Option<Commit>) {
    if let Some(commit) = commit {
        info!(deal_id = commit.deal_id, status = %commit.status, "deal triaged");
        // The handle is dropped: nothing waits on a triage commit.
        let _ = session
            .commits
            .dispatch(Arc::clone(&app.store), session.bearer(), commit);
    }
}

fn terminal_status(raw: &str) -> Result<DealStatus, ServerError> {
    match DealStatus::parse(raw) {
        Some(status @ (DealStatus::Saved | DealStatus::Deleted)) => Ok(status),
        _ => Err(ServerError::BadRequest(format!("unsupported status {raw:?}"))),
    }
}

fn param<'a>(params: &'a Params, name: &str) -> Result<&'a str, ServerError> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| ServerError::BadRequest(format!("missing {name}")))
}

fn int_param(params: &Params, name: &str) -> Result<i64, ServerError> {
    param(params, name)?
        .trim()
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("{name} must be an integer")))
}

fn read_body(req: Request) -> Result<Vec<u8>, ServerError> {
    let mut buf = Vec::new();
    req.into_body()
        .reader()
        .read_to_end(&mut buf)
        .map_err(|e| ServerError::BadRequest(format!("unreadable body: {e}")))?;
    Ok(buf)
}

fn parse_form(body: &[u8]) -> Params {
    url::form_urlencoded::parse(body).into_owned().collect()
}

fn parse_query(req: &Request) -> Params {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
