use axum_test::multipart::{MultipartForm, Part};

/// PNG signature followed by a few filler bytes; content is never decoded
pub fn png_bytes() -> Vec<u8> {
    let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
    data.extend_from_slice(&[0u8; 24]);
    data
}

pub fn banner_part(data: Vec<u8>, file_name: &str, mime_type: &str) -> Part {
    Part::bytes(data).file_name(file_name).mime_type(mime_type)
}

/// Upload form with a PNG banner and the given text fields
pub fn banner_form(fields: &[(&str, &str)]) -> MultipartForm {
    let mut form = MultipartForm::new();
    for (name, value) in fields {
        form = form.add_text(name.to_string(), value.to_string());
    }
    form.add_part("banner", banner_part(png_bytes(), "summer.png", "image/png"))
}
