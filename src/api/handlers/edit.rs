use crate::AppState;
use crate::api::views::{self, Notice};
use crate::services::edit_service::{EditError, EditRequest, UploadedFile};
use axum::{
    extract::{Multipart, State, multipart::MultipartError},
    response::Html,
};
use tracing::{error, warn};

pub async fn edit_form(State(state): State<AppState>) -> Html<String> {
    Html(views::index_page(&state.operations, &[]))
}

/// Handles the upload form. Every outcome re-renders the form with notices.
pub async fn edit_image(State(state): State<AppState>, mut multipart: Multipart) -> Html<String> {
    let request = match read_edit_form(&mut multipart).await {
        Ok(request) => request,
        Err(e) => {
            warn!("Unreadable edit form: {}", e);
            let notice = Notice::error(format!("Could not read the upload: {}", e.body_text()));
            return Html(views::index_page(&state.operations, &[notice]));
        }
    };

    let notices = match state.edit_service.process(request).await {
        Ok(record) => vec![
            Notice::success("Your image has been processed and is available")
                .with_link(format!("/{}", record.processed_filename), "here"),
        ],
        Err(EditError::Processing(e)) => vec![
            Notice::error(e.to_string()),
            Notice::error("Error processing the image."),
        ],
        Err(EditError::Internal(e)) => {
            error!("Edit request failed: {:?}", e);
            vec![Notice::error("Something went wrong while saving the image.")]
        }
        Err(e) => vec![Notice::error(e.to_string())],
    };

    Html(views::index_page(&state.operations, &notices))
}

async fn read_edit_form(multipart: &mut Multipart) -> Result<EditRequest, MultipartError> {
    let mut request = EditRequest::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?.to_vec();
                request.file = Some(UploadedFile { filename, data });
            }
            "operation" => {
                request.operation = field.text().await?;
            }
            _ => {}
        }
    }

    Ok(request)
}
