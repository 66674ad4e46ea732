//! Product catalog pages.
//!
//! HTML Endpoints:
//! - `GET  /productos`                — listing with search, category filter and sort
//! - `GET  /productos/nuevo`          — creation form (admin)
//! - `POST /productos`                — create product (admin)
//! - `GET  /productos/{id}/editar`    — edit form (admin)
//! - `POST /productos/{id}`           — update product (admin)
//! - `POST /productos/{id}/eliminar`  — delete product (admin)

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use inventario_core::{
    catalog::{SortKey, CATEGORY_ALL},
    domain::product::{Product, ProductDraft, ProductId, ProductPatch},
    errors::DomainError,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tera::Context;
use tracing::error;

use crate::auth::{AuthSession, Flash};
use crate::bootstrap::AppState;
use crate::service::ServiceError;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub buscar: Option<String>,
    pub categoria: Option<String>,
    pub ordenar: Option<String>,
}

/// Raw form submission. Numbers arrive as text so a bad value can be
/// reported as a validation message instead of a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct ProductForm {
    pub codigo: Option<String>,
    pub nombre: Option<String>,
    pub categoria: Option<String>,
    pub precio: Option<String>,
    pub stock: Option<String>,
    pub activo: Option<String>,
}

impl ProductForm {
    fn precio_decimal(&self) -> Result<Option<Decimal>, DomainError> {
        parse_number(self.precio.as_deref(), "precio", "el precio debe ser un número válido")
    }

    fn stock_i64(&self) -> Result<Option<i64>, DomainError> {
        parse_number(self.stock.as_deref(), "stock", "el stock debe ser un número entero")
    }

    fn draft(&self) -> Result<ProductDraft, DomainError> {
        Ok(ProductDraft {
            code: self.codigo.clone(),
            name: self.nombre.clone(),
            category: self.categoria.clone(),
            price: self.precio_decimal()?,
            stock: self.stock_i64()?,
            active: Some(self.activo.is_some()),
        })
    }

    fn patch(&self) -> Result<ProductPatch, DomainError> {
        Ok(ProductPatch {
            name: self.nombre.clone(),
            category: self.categoria.clone(),
            price: self.precio_decimal()?,
            stock: self.stock_i64()?,
            active: Some(self.activo.is_some()),
        })
    }
}

fn parse_number<T: FromStr>(
    raw: Option<&str>,
    field: &'static str,
    message: &str,
) -> Result<Option<T>, DomainError> {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<T>().map(Some).map_err(|_| DomainError::validation(field, message))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub async fn list_products(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Query(query): Query<ListQuery>,
) -> Response {
    let sort = SortKey::from_raw(query.ordenar.as_deref());
    let products = match state
        .service
        .search_and_filter(query.buscar.as_deref(), query.categoria.as_deref(), sort)
        .await
    {
        Ok(products) => products,
        Err(err) => return service_failure(err),
    };
    let categories = match state.service.category_options().await {
        Ok(categories) => categories,
        Err(err) => return service_failure(err),
    };

    let mut context = Context::new();
    context.insert("productos", &products);
    context.insert("buscar", &query.buscar.as_deref().map(str::trim).unwrap_or_default());
    context.insert(
        "categoria_seleccionada",
        &query.categoria.as_deref().filter(|c| !c.trim().is_empty()).unwrap_or(CATEGORY_ALL),
    );
    context.insert("ordenar", sort.as_raw());
    context.insert("categorias", &categories);
    context.insert("usuario", &session.user);

    if let Some(flash) = state.sessions.take_flash(&session.token) {
        context.insert("mensaje", &flash.message);
        context.insert("tipo_mensaje", flash.kind);
    }

    render(&state, "productos/listado.html", &context, StatusCode::OK)
}

pub async fn new_product_page(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
) -> Response {
    let context = form_context(&session, "crear", None, &ProductForm::default(), None);
    render(&state, "productos/formulario.html", &context, StatusCode::OK)
}

pub async fn create_product(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Form(form): Form<ProductForm>,
) -> Response {
    let draft = match form.draft() {
        Ok(draft) => draft,
        Err(err) => return create_form_with_error(&state, &session, &form, &err.to_string()),
    };

    match state.service.create(&draft).await {
        Ok(saved) => {
            state
                .sessions
                .put_flash(&session.token, Flash::success(format!("Producto {} creado exitosamente", saved.code)));
            Redirect::to("/productos").into_response()
        }
        Err(ServiceError::Domain(err)) => {
            create_form_with_error(&state, &session, &form, &err.to_string())
        }
        Err(err) => service_failure(err),
    }
}

pub async fn edit_product_page(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> Response {
    let id = ProductId(id);
    match state.service.get_by_id(id).await {
        Ok(Some(product)) => {
            let form = form_from_product(&product);
            let context = form_context(&session, "editar", Some(&product), &form, None);
            render(&state, "productos/formulario.html", &context, StatusCode::OK)
        }
        Ok(None) => not_found(id),
        Err(err) => service_failure(err),
    }
}

pub async fn update_product(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
    Form(form): Form<ProductForm>,
) -> Response {
    let id = ProductId(id);
    let patch = match form.patch() {
        Ok(patch) => patch,
        Err(err) => return edit_form_with_error(&state, &session, id, &form, &err.to_string()).await,
    };

    match state.service.update(id, &patch).await {
        Ok(saved) => {
            state
                .sessions
                .put_flash(&session.token, Flash::success(format!("Producto {} actualizado exitosamente", saved.code)));
            Redirect::to("/productos").into_response()
        }
        Err(ServiceError::Domain(DomainError::NotFound(id))) => not_found(id),
        Err(ServiceError::Domain(err)) => {
            edit_form_with_error(&state, &session, id, &form, &err.to_string()).await
        }
        Err(err) => service_failure(err),
    }
}

pub async fn delete_product(
    State(state): State<AppState>,
    Extension(session): Extension<AuthSession>,
    Path(id): Path<i64>,
) -> Response {
    let id = ProductId(id);
    match state.service.delete(id).await {
        Ok(()) => {
            state.sessions.put_flash(&session.token, Flash::success("Producto eliminado exitosamente"));
            Redirect::to("/productos").into_response()
        }
        Err(ServiceError::Domain(DomainError::NotFound(id))) => not_found(id),
        Err(err) => service_failure(err),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn form_from_product(product: &Product) -> ProductForm {
    ProductForm {
        codigo: Some(product.code.clone()),
        nombre: Some(product.name.clone()),
        categoria: product.category.clone(),
        precio: Some(product.price.to_string()),
        stock: Some(product.stock.to_string()),
        activo: product.active.then(|| "on".to_string()),
    }
}

fn form_context(
    session: &AuthSession,
    mode: &str,
    product: Option<&Product>,
    form: &ProductForm,
    error: Option<&str>,
) -> Context {
    let mut context = Context::new();
    context.insert("modo", mode);
    context.insert("usuario", &session.user);
    context.insert("error", &error);
    if let Some(product) = product {
        context.insert("producto_id", &product.id.map(|id| id.0));
    }
    context.insert("codigo", &form.codigo.as_deref().unwrap_or_default());
    context.insert("nombre", &form.nombre.as_deref().unwrap_or_default());
    context.insert("categoria", &form.categoria.as_deref().unwrap_or_default());
    context.insert("precio", &form.precio.as_deref().unwrap_or_default());
    context.insert("stock", &form.stock.as_deref().unwrap_or_default());
    context.insert("activo", &form.activo.is_some());
    context
}

fn create_form_with_error(
    state: &AppState,
    session: &AuthSession,
    form: &ProductForm,
    error: &str,
) -> Response {
    let context = form_context(session, "crear", None, form, Some(error));
    render(state, "productos/formulario.html", &context, StatusCode::UNPROCESSABLE_ENTITY)
}

async fn edit_form_with_error(
    state: &AppState,
    session: &AuthSession,
    id: ProductId,
    form: &ProductForm,
    error: &str,
) -> Response {
    let product = match state.service.get_by_id(id).await {
        Ok(Some(product)) => product,
        Ok(None) => return not_found(id),
        Err(err) => return service_failure(err),
    };
    let context = form_context(session, "editar", Some(&product), form, Some(error));
    render(state, "productos/formulario.html", &context, StatusCode::UNPROCESSABLE_ENTITY)
}

fn not_found(id: ProductId) -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(format!("<h1>404</h1><p>producto {id} no encontrado</p>")),
    )
        .into_response()
}

fn service_failure(err: ServiceError) -> Response {
    error!(error = %err, "product page request failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(format!("<h1>Error</h1><p>{}</p>", err.user_message())),
    )
        .into_response()
}

fn render(state: &AppState, name: &str, context: &Context, status: StatusCode) -> Response {
    match state.templates.render(name, context) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("<h1>Template Error</h1><pre>{err:?}</pre>")),
        )
            .into_response(),
    }
}
