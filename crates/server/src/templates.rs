//! Tera template engine setup.
//!
//! Templates are loaded from the `templates/` directory when present and
//! fall back to copies embedded at compile time, so the binary renders
//! pages even when deployed without the template tree alongside it.

use std::sync::Arc;

use tera::Tera;
use tracing::warn;

pub fn init_templates() -> Arc<Tera> {
    let mut tera = match Tera::new("templates/**/*") {
        Ok(t) => t,
        Err(e) => {
            warn!(error = %e, "Failed to load templates from filesystem, using empty Tera instance");
            Tera::default()
        }
    };

    // Embedded fallbacks in case filesystem templates are not available
    tera.add_raw_template("login.html", include_str!("../../../templates/login.html")).ok();
    tera.add_raw_template("dashboard.html", include_str!("../../../templates/dashboard.html")).ok();
    tera.add_raw_template(
        "productos/listado.html",
        include_str!("../../../templates/productos/listado.html"),
    )
    .ok();
    tera.add_raw_template(
        "productos/formulario.html",
        include_str!("../../../templates/productos/formulario.html"),
    )
    .ok();

    Arc::new(tera)
}
