use nnd_common::serde::{self, Deserialize, Serialize};
use nnd_common::serde_json::Value;

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "self::serde")]
pub struct LusciousTopLevel {
    pub data: LusciousData,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "self::serde")]
pub struct LusciousData {
    pub picture: PictureField,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "self::serde")]
pub struct PictureField {
    pub list: PictureList,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "self::serde")]
pub struct PictureList {
    pub info: ListInfo,
    #[serde(default)]
    pub items: Vec<LusciousPicture>,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(crate = "self::serde")]
pub struct ListInfo {
    pub page: Option<u64>,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub total_pages: u64,
    #[serde(default)]
    pub total_items: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(crate = "self::serde")]
pub struct LusciousPicture {
    /// The API sends ids as strings, older answers as numbers.
    pub id: Value,
    pub title: Option<String>,
    pub url_to_original: Option<String>,
}

impl LusciousPicture {
    pub fn id(&self) -> String {
        match &self.id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}
