//! This module provides a client to connect to a to-do list REST service

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::{device_id, Settings};
use crate::error::RemoteError;
use crate::item::{Item, ItemId};
use crate::resource::Resource;
use crate::traits::TodoRemote;

pub mod element;
use element::{ElementResponse, ListResponse, STATUS_OK};

const LIST_PATH: &str = "list";


/// A to-do list source that fetches its data from a REST service
pub struct Client {
    resource: Resource,
    http: reqwest::Client,
    /// The last revision of the list the server has told us about
    revision: Option<i64>,
}

impl Client {
    /// Create a client. This does not start a connection
    pub fn new<S: AsRef<str>, T: ToString>(url: S, token: T) -> Result<Self, RemoteError> {
        let url: url::Url = url.as_ref().parse()?;
        Ok(Self::from_resource(Resource::new(url, token.to_string())))
    }

    pub fn from_resource(resource: Resource) -> Self {
        Self {
            resource,
            http: reqwest::Client::new(),
            revision: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::from_resource(settings.server.clone())
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// The revision of the list, as of the last successful request
    pub fn revision(&self) -> Option<i64> {
        self.revision
    }

    fn item_path(id: &ItemId) -> String {
        format!("{}/{}", LIST_PATH, id)
    }

    async fn request<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, RemoteError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let target = self.resource.combine(path)?;
        log::debug!("{} {}", method, target.url());

        let mut builder = self.http
            .request(method, target.url().clone())
            .header(AUTHORIZATION, format!("Bearer {}", target.token()));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        RemoteError::check_status(response.status().as_u16())?;

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(RemoteError::Decode)
    }

    fn check_reply_status(&mut self, status: &str, revision: Option<i64>) -> Result<(), RemoteError> {
        if status != STATUS_OK {
            return Err(RemoteError::UnexpectedResponse(format!("status is {:?}", status)));
        }
        if revision.is_some() {
            self.revision = revision;
        }
        Ok(())
    }

    fn handle_list_reply(&mut self, reply: ListResponse) -> Result<Vec<Item>, RemoteError> {
        self.check_reply_status(&reply.status, reply.revision)?;

        let mut items = Vec::with_capacity(reply.list.len());
        let mut skipped = 0;
        for element in reply.list {
            match element.into_item() {
                Ok(item) => items.push(item),
                Err(err) => {
                    log::debug!("Ignoring an invalid element from the server: {}", err);
                    skipped += 1;
                },
            }
        }
        if skipped > 0 {
            log::warn!("{} invalid elements from the server have been ignored", skipped);
        }
        Ok(items)
    }

    fn handle_element_reply(&mut self, reply: ElementResponse) -> Result<Item, RemoteError> {
        self.check_reply_status(&reply.status, reply.revision)?;
        reply.element.into_item()
            .map_err(RemoteError::UnexpectedResponse)
    }
}

#[async_trait]
impl TodoRemote for Client {
    async fn get_list(&mut self) -> Result<Vec<Item>, RemoteError> {
        let reply: ListResponse = self.request::<(), _>(Method::GET, LIST_PATH, None).await?;
        self.handle_list_reply(reply)
    }

    async fn replace_list(&mut self, items: Vec<Item>) -> Result<Vec<Item>, RemoteError> {
        let body = ListResponse::request(&items, &device_id());
        let reply: ListResponse = self.request(Method::POST, LIST_PATH, Some(&body)).await?;
        self.handle_list_reply(reply)
    }

    async fn create_item(&mut self, item: &Item) -> Result<Item, RemoteError> {
        let body = ElementResponse::request(item, &device_id());
        let reply: ElementResponse = self.request(Method::POST, &Self::item_path(item.id()), Some(&body)).await?;
        self.handle_element_reply(reply)
    }

    async fn update_item(&mut self, item: &Item) -> Result<Item, RemoteError> {
        let body = ElementResponse::request(item, &device_id());
        let reply: ElementResponse = self.request(Method::PUT, &Self::item_path(item.id()), Some(&body)).await?;
        self.handle_element_reply(reply)
    }

    async fn delete_item(&mut self, id: &ItemId) -> Result<(), RemoteError> {
        let reply: ElementResponse = self.request::<(), _>(Method::DELETE, &Self::item_path(id), None).await?;
        self.check_reply_status(&reply.status, reply.revision)
    }
}
