use rocket::response::content::{RawCss, RawHtml, RawJavaScript};
use rocket::Route;

pub fn statics() -> Vec<Route> {
    routes![
        home_page,
        scripts_js,
        style_css,
    ]
}

#[get("/")]
fn home_page() -> RawHtml<&'static str> {
    RawHtml(include_str!("../assets/home-page.html"))
}

#[get("/scripts/scripts.js")]
fn scripts_js() -> RawJavaScript<&'static str> {
    RawJavaScript(include_str!("../assets/scripts/scripts.js"))
}

#[get("/styles/style.css")]
fn style_css() -> RawCss<&'static str> {
    RawCss(include_str!("../assets/styles/style.css"))
}
