use askama::Template;
use axum::response::IntoResponse;

/// Landing page. Every page extends `layout.html`.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: &'static str,
}

pub async fn index() -> impl IntoResponse {
    IndexTemplate { title: "Recipes" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_renders_inside_layout() {
        let html = IndexTemplate { title: "Recipes" }.render().unwrap();
        assert!(html.contains("<title>Recipes</title>"));
        assert!(html.contains("/static/css/main.css"));
        assert!(html.contains("id=\"content\""));
    }
}
