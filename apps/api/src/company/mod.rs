// Company branding: append-only versions, the newest one brands new letters.

pub mod handlers;
