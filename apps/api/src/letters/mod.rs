// Appreciation letters: the content snapshot model, HTML rendering,
// generation, and the CRUD handlers. Both exporters read `content`.

pub mod content;
pub mod generator;
pub mod handlers;
pub mod html;
