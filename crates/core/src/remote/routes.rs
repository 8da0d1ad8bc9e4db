/// The single configured route table for the backend REST surface.
/// One path per operation; there is no alternate-endpoint probing.
#[derive(Debug, Clone)]
pub struct Routes {
    base: String,
}

impl Routes {
    /// `base` is the API root including any prefix, e.g. `https://host/api`.
    /// A trailing slash is tolerated.
    pub fn new(base: impl Into<String>) -> Self {
        let mut base = base.into();
        while base.ends_with('/') {
            base.pop();
        }
        Self { base }
    }

    #[must_use]
    pub fn health(&self) -> String {
        format!("{}/health", self.base)
    }

    #[must_use]
    pub fn projects(&self) -> String {
        format!("{}/projects", self.base)
    }

    #[must_use]
    pub fn project(&self, id: &str) -> String {
        format!("{}/projects/{}", self.base, id)
    }

    #[must_use]
    pub fn transactions(&self, project_id: &str) -> String {
        format!("{}/projects/{}/transactions", self.base, project_id)
    }

    #[must_use]
    pub fn transaction(&self, project_id: &str, tx_id: &str) -> String {
        format!("{}/projects/{}/transactions/{}", self.base, project_id, tx_id)
    }
}
