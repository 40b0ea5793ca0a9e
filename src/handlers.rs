use actix_web::{delete, get, post, web, HttpResponse};
use mongodb::bson::DateTime;
use regex::Regex;
use serde::Deserialize;

use crate::db::Backend;
use crate::error::StoreError;
use crate::models::{MailingList, Subscriber, Subscription};
use crate::store::EntityStore;

fn is_valid_email(email: &str) -> bool {
    let email_regex = Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+$").unwrap();
    email_regex.is_match(email)
}

#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub subscriber_email: String,
}

#[post("/mailing-lists")]
pub async fn create_mailing_list(
    backend: web::Data<Backend>,
    list: web::Json<MailingList>,
) -> Result<HttpResponse, StoreError> {
    let list = list.into_inner();
    list.insert(backend.database()).await?;
    Ok(HttpResponse::Created().json(list))
}

#[delete("/mailing-lists/{name}")]
pub async fn delete_mailing_list(
    backend: web::Data<Backend>,
    name: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let deleted = MailingList::delete_by_name(backend.database(), &name).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "deleted": deleted })))
}

#[get("/mailing-lists/{name}")]
pub async fn get_mailing_list(
    backend: web::Data<Backend>,
    name: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let list = MailingList::find_by_name(backend.database(), &name).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[get("/mailing-lists")]
pub async fn list_mailing_lists(
    backend: web::Data<Backend>,
) -> Result<HttpResponse, StoreError> {
    let lists = MailingList::find_all(backend.database()).await?;
    Ok(HttpResponse::Ok().json(lists))
}

#[post("/subscribers")]
pub async fn create_subscriber(
    backend: web::Data<Backend>,
    subscriber: web::Json<Subscriber>,
) -> Result<HttpResponse, StoreError> {
    let subscriber = subscriber.into_inner();
    if !is_valid_email(&subscriber.email) {
        return Ok(HttpResponse::BadRequest().json("Invalid email format"));
    }

    subscriber.insert(backend.database()).await?;
    Ok(HttpResponse::Created().json(subscriber))
}

#[delete("/subscribers/{email}")]
pub async fn delete_subscriber(
    backend: web::Data<Backend>,
    email: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let counts = Subscriber::delete_cascading(backend.database(), &email).await?;
    Ok(HttpResponse::Ok().json(counts))
}

#[get("/subscribers/{email}/mailing-lists")]
pub async fn get_subscriber_lists(
    backend: web::Data<Backend>,
    email: web::Path<String>,
) -> Result<HttpResponse, StoreError> {
    let lists = MailingList::find_for_subscriber(backend.database(), &email).await?;
    Ok(HttpResponse::Ok().json(lists))
}

#[post("/mailing-lists/{name}/subscriptions")]
pub async fn subscribe(
    backend: web::Data<Backend>,
    name: web::Path<String>,
    request: web::Json<SubscribeRequest>,
) -> Result<HttpResponse, StoreError> {
    if !is_valid_email(&request.subscriber_email) {
        return Ok(HttpResponse::BadRequest().json("Invalid email format"));
    }

    Subscription::insert(
        backend.database(),
        &name,
        &request.subscriber_email,
        DateTime::now(),
    )
    .await?;
    Ok(HttpResponse::Created().finish())
}

#[delete("/mailing-lists/{name}/subscriptions/{email}")]
pub async fn unsubscribe(
    backend: web::Data<Backend>,
    path: web::Path<(String, String)>,
) -> Result<HttpResponse, StoreError> {
    let (name, email) = path.into_inner();
    let removed = Subscription::delete(backend.database(), &name, &email).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "removed": removed })))
}

#[cfg(test)]
mod tests {
    use super::is_valid_email;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("test3@gmail.com"));
        assert!(is_valid_email("first.last+tag@sub-domain.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing@tld"));
        assert!(!is_valid_email("@nobody.example"));
        assert!(!is_valid_email("spaces in@example.com"));
    }
}
