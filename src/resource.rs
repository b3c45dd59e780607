use url::Url;

/// Just a wrapper around a URL and its bearer token
#[derive(Clone, Debug)]
pub struct Resource {
    url: Url,
    token: String,
}

impl Resource {
    pub fn new(url: Url, token: String) -> Self {
        Self { url, token }
    }

    pub fn url(&self) -> &Url { &self.url }
    pub fn token(&self) -> &str { &self.token }

    /// Build a new Resource by keeping the same token, scheme and server from `self`, and appending `relative_path` to its path
    pub fn combine(&self, relative_path: &str) -> Result<Resource, url::ParseError> {
        let mut base = self.url.clone();
        if base.path().ends_with('/') == false {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        let url = base.join(relative_path.trim_start_matches('/'))?;
        Ok(Resource { url, token: self.token.clone() })
    }
}
