//! S3-compatible object storage

use super::Destination;
use crate::config::Secret;
use std::collections::HashMap;

pub const ACCESS_KEY_ID_ENV: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";

#[derive(Debug, Clone)]
pub struct S3Destination {
    bucket: String,
    access_key_id: String,
    secret_access_key: Secret,
}

impl S3Destination {
    pub fn new(
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: Secret,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl Destination for S3Destination {
    fn pretty_name(&self) -> String {
        format!("s3:{}", self.bucket)
    }

    fn transport_url(&self, server_name: &str) -> String {
        format!("s3+http://{}/{}", self.bucket, server_name.to_lowercase())
    }

    fn transport_options(&self) -> Vec<String> {
        vec!["--s3-use-new-style".to_string()]
    }

    fn transport_env(&self) -> HashMap<String, String> {
        HashMap::from([
            (ACCESS_KEY_ID_ENV.to_string(), self.access_key_id.clone()),
            (
                SECRET_ACCESS_KEY_ENV.to_string(),
                self.secret_access_key.expose().to_string(),
            ),
        ])
    }
}
