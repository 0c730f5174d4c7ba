//! JSON shapes of the key-phrase endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct KeyPhraseRequest<'a> {
    pub documents: [RequestDocument<'a>; 1],
}

#[derive(Debug, Serialize)]
pub(crate) struct RequestDocument<'a> {
    pub language: &'a str,
    pub id: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeyPhraseResponse {
    pub documents: Vec<ResponseDocument>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResponseDocument {
    #[serde(default)]
    pub id: Option<String>,
    pub key_phrases: Vec<String>,
}
