use std::collections::HashMap;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;

use tiddly_core::store::validate_wiki_name;

use crate::state::AppState;

/// Upload size ceiling for `/store`.
pub const MAX_UPLOAD_BYTES: usize = 32 << 20;

const OPTIONS_FIELD: &str = "UploadPlugin";
const FILE_FIELD: &str = "userfile";

/// Plain-text reply; the TiddlyWiki UploadPlugin treats a body starting with
/// `0 - ` as success and shows anything else to the user.
type Reply = (StatusCode, String);

fn reply(status: StatusCode, msg: impl Into<String>) -> Reply {
    (status, msg.into())
}

/// Parse `key=value;key=value` upload options. Pairs without `=` are ignored.
pub fn parse_options(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|opt| opt.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

struct Upload {
    options: Option<String>,
    file: Option<(String, Vec<u8>)>,
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, MultipartError> {
    let mut upload = Upload {
        options: None,
        file: None,
    };
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(OPTIONS_FIELD) => upload.options = Some(field.text().await?),
            Some(FILE_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?.to_vec();
                upload.file = Some((filename, data));
            }
            _ => {}
        }
    }
    Ok(upload)
}

/// POST /store: replace a wiki page with the uploaded file.
///
/// Hooks registered for `prestore` / `poststore` run around the write. Their
/// failures are only logged; the reply reflects the write alone.
pub async fn store_wiki(State(app): State<AppState>, multipart: Multipart) -> Reply {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(e) => {
            tracing::warn!("error while parsing form: {e}");
            return reply(StatusCode::BAD_REQUEST, "Couldn't parse the form data!");
        }
    };

    let Some(raw_options) = upload.options else {
        return reply(
            StatusCode::BAD_REQUEST,
            format!("Couldn't find '{OPTIONS_FIELD}' in the form data!"),
        );
    };
    let options = parse_options(&raw_options);

    let Some(user) = options.get("user") else {
        return reply(
            StatusCode::BAD_REQUEST,
            "Couldn't find 'user' in the form data!",
        );
    };
    let Some(pass) = options.get("password") else {
        return reply(
            StatusCode::BAD_REQUEST,
            "Couldn't find 'password' in the form data!",
        );
    };
    if *user != app.config.username {
        return reply(StatusCode::UNAUTHORIZED, "Error: Username does not match!");
    }
    if *pass != app.config.password {
        return reply(StatusCode::UNAUTHORIZED, "Error: Password does not match!");
    }

    let Some((filename, data)) = upload.file else {
        return reply(StatusCode::BAD_REQUEST, "Couldn't upload the file!");
    };
    let name = match validate_wiki_name(&filename) {
        Ok(name) => name,
        Err(_) => return reply(StatusCode::BAD_REQUEST, "Invalid file name!"),
    };

    let store = app.store.clone();
    let events = app.events.clone();
    let stored_name = name.clone();
    let result = tokio::task::spawn_blocking(move || {
        store.store(&stored_name, &mut data.as_slice(), &events)
    })
    .await;

    match result {
        Ok(Ok(_)) => {
            tracing::info!("successfully uploaded: '{name}'");
            reply(
                StatusCode::OK,
                format!("0 - File successfully loaded in '{name}'\n"),
            )
        }
        Ok(Err(e)) => {
            tracing::error!("error while storing '{name}': {e}");
            reply(StatusCode::INTERNAL_SERVER_ERROR, "Couldn't upload the file!")
        }
        Err(e) => {
            tracing::error!("store task failed for '{name}': {e}");
            reply(StatusCode::INTERNAL_SERVER_ERROR, "Couldn't upload the file!")
        }
    }
}
