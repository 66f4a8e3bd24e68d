pub mod export;
pub mod input;
pub mod recognition;
pub mod storage;

mod config;
pub use config::{store_api_key, Config};

pub mod api;

pub struct AppState {
    pub store: storage::Store,
    pub recognizer: tokio::sync::RwLock<recognition::Recognizer>,
    pub upload_folder: std::path::PathBuf,
    pub export_folder: std::path::PathBuf,
    /// Rewritten when the API key is replaced at runtime.
    pub env_file: Option<std::path::PathBuf>,
}

impl AppState {
    pub fn new(storage: Box<dyn storage::LeagueStorage>, recognizer: recognition::Recognizer) -> Self {
        Self {
            store: storage::Store::new(storage),
            recognizer: tokio::sync::RwLock::new(recognizer),
            upload_folder: std::path::PathBuf::from("uploads/"),
            export_folder: std::path::PathBuf::from("exports/"),
            env_file: None,
        }
    }

    pub fn with_folders<U, E>(mut self, upload_folder: U, export_folder: E) -> Self
    where
        U: Into<std::path::PathBuf>,
        E: Into<std::path::PathBuf>,
    {
        self.upload_folder = upload_folder.into();
        self.export_folder = export_folder.into();
        self
    }

    pub fn with_env_file<P>(mut self, env_file: P) -> Self
    where
        P: Into<std::path::PathBuf>,
    {
        self.env_file = Some(env_file.into());
        self
    }
}

pub struct UploadedImage {
    pub path: std::path::PathBuf,
    pub filename: String,
    pub mime_type: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("no file uploaded")]
    MissingFile,
    #[error("unsupported file type")]
    UnsupportedType,
    #[error("multipart: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Streams the image in the `name` field of the form into `folder`.
pub async fn store_image_from_upload(
    name: &str,
    folder: &std::path::Path,
    mut form: axum::extract::Multipart,
) -> Result<UploadedImage, UploadError> {
    use futures::StreamExt;

    while let Some(field) = form.next_field().await? {
        if field.name().map(|n| n != name).unwrap_or(true) {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_owned();
        if original.is_empty() {
            return Err(UploadError::MissingFile);
        }
        let mime_type = recognition::mime_type(&original).ok_or(UploadError::UnsupportedType)?;

        if !tokio::fs::try_exists(folder).await.unwrap_or(false) {
            tokio::fs::create_dir_all(folder).await?;
        }

        let filename = format!("{}_{}", uuid::Uuid::now_v7(), sanitize_filename(&original));
        let path = folder.join(&filename);

        // Convert the field into an `AsyncRead`.
        let body_with_io_error = field.map(|chunk| chunk.map_err(std::io::Error::other));
        let body_reader = tokio_util::io::StreamReader::new(body_with_io_error);
        futures::pin_mut!(body_reader);

        let mut file = tokio::io::BufWriter::new(tokio::fs::File::create(&path).await?);
        tokio::io::copy(&mut body_reader, &mut file).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;

        return Ok(UploadedImage {
            path,
            filename,
            mime_type,
        });
    }

    Err(UploadError::MissingFile)
}
