use serde::Deserialize;

#[derive(Default, Deserialize)]
pub struct FlashQuery {
    pub status: Option<String>,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct AddSubjectForm {
    #[serde(default)]
    pub subject_name: String,
}

#[derive(Deserialize)]
pub struct RenameSubjectForm {
    #[serde(default)]
    pub new_name: String,
}
