//! OpenAPI document for the supplier and account endpoints, served at `/swagger.json`,
//! with a Swagger UI page at `/swagger`.

use crate::auth::{IdentityError, UserResponse, UserToken};
use crate::handlers::{account, supplier};
use crate::models::{Supplier, SupplierInput, UserClaim};
use axum::{http::header, response::IntoResponse, routing::get, Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Fornecedor API",
        description = "Supplier CRUD with JWT authentication"
    ),
    paths(
        supplier::list_active,
        supplier::get_by_key,
        supplier::create,
        supplier::update,
        supplier::delete,
        account::register,
        account::login,
    ),
    components(schemas(
        Supplier,
        SupplierInput,
        UserClaim,
        UserResponse,
        UserToken,
        IdentityError,
        account::RegisterUser,
        account::LoginUser,
    )),
    modifiers(&BearerScheme),
    tags(
        (name = "Fornecedor", description = "Supplier records"),
        (name = "Auth", description = "Registration and login")
    )
)]
pub struct ApiDoc;

struct BearerScheme;

impl Modify for BearerScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Send the token as: Bearer {token}"))
                        .build(),
                ),
            );
        }
    }
}

async fn swagger_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>Fornecedor API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js" crossorigin></script>
  <script>
    window.onload = () => {
      window.ui = SwaggerUIBundle({ url: "/swagger.json", dom_id: "#swagger-ui" });
    };
  </script>
</body>
</html>
"##;

async fn swagger_ui() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        SWAGGER_UI_HTML,
    )
}

pub fn docs_routes() -> Router {
    Router::new()
        .route("/swagger.json", get(swagger_json))
        .route("/swagger", get(swagger_ui))
}
