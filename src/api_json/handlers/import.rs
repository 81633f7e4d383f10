use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use chrono::Datelike;
use futures_util::stream::StreamExt;
use serde_json::json;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{error, info};

use crate::api_json::Caller;
use crate::error::AppError;
use crate::excel::{check_extension, ParseContext};
use crate::import::run_import;
use crate::server::AppState;

/// Campo multipart que trae la planilla.
pub const UPLOAD_FIELD: &str = "file";

/// POST /import/agenda
/// Recibe la planilla (`multipart/form-data`, campo `file`), la guarda en
/// `upload_dir` y la importa. 200 con el reporte (incluye errores por fila),
/// 400 si el archivo no es una planilla legible.
pub async fn import_agenda_handler(caller: Caller, state: web::Data<AppState>, mut payload: Multipart) -> impl Responder {
    let upload = match save_upload(&state.config.upload_dir, &mut payload).await {
        Ok(Some(f)) => f,
        Ok(None) => {
            return HttpResponse::BadRequest()
                .json(json!({"error": format!("multipart field '{}' with a spreadsheet is required", UPLOAD_FIELD)}))
        }
        Err(e) => return e.to_response(),
    };
    info!(user = %caller.user, path = %upload.path().display(), "importación recibida");

    // una importación a la vez: evita crear dos veces la misma turma/UC
    let permit = match state.import_permit.clone().acquire_owned().await {
        Ok(p) => p,
        Err(_) => return HttpResponse::InternalServerError().json(json!({"error": "failed to acquire import permit"})),
    };

    let state_block = state.clone();
    let blocking = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        let ctx = ParseContext {
            default_year: chrono::Local::now().year(),
            sheet: state_block.config.sheet.clone(),
        };
        let result = run_import(&state_block.pool, upload.path(), &ctx);
        // el archivo temporal se borra aquí
        drop(upload);
        result
    });

    match blocking.await {
        Ok(Ok(report)) => HttpResponse::Ok().json(report),
        Ok(Err(e)) => {
            info!(user = %caller.user, error = %e, "importación rechazada");
            e.to_response()
        }
        Err(e) => {
            error!(error = %e, "import task failed");
            HttpResponse::InternalServerError().json(json!({"error": format!("task join error: {}", e)}))
        }
    }
}

/// Guarda el campo `file` en un temporal dentro de `dir`. `Ok(None)` si no vino.
async fn save_upload(dir: &Path, payload: &mut Multipart) -> Result<Option<NamedTempFile>, AppError> {
    tokio::fs::create_dir_all(dir).await?;

    while let Some(field_res) = payload.next().await {
        let mut field = field_res.map_err(|e| AppError::Validation(format!("multipart error: {}", e)))?;
        let name = field.content_disposition().get_name().map(str::to_string);
        let filename = field.content_disposition().get_filename().unwrap_or("").to_string();
        if name.as_deref() != Some(UPLOAD_FIELD) {
            // drenar campos ajenos
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| AppError::Validation(format!("multipart error: {}", e)))?;
            }
            continue;
        }

        check_extension(&filename)?;
        let ext = Path::new(&filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("xlsx")
            .to_ascii_lowercase();

        let tmp = tempfile::Builder::new()
            .prefix("agenda-")
            .suffix(&format!(".{}", ext))
            .tempfile_in(dir)?;
        let mut out = tokio::fs::File::from_std(tmp.as_file().try_clone()?);
        while let Some(chunk) = field.next().await {
            let bytes = chunk.map_err(|e| AppError::Validation(format!("upload stream error: {}", e)))?;
            out.write_all(&bytes).await?;
        }
        out.flush().await?;
        return Ok(Some(tmp));
    }

    Ok(None)
}
