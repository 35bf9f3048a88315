//! Pure transforms over captured page markup. Nothing here touches the browser.

pub mod extract;
pub mod html;
