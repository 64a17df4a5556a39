// Employee records: list, create (unique email), delete (cascades to letters).

pub mod handlers;
