pub mod accounts;
pub mod correction;
pub mod ingest;
pub mod language;
pub mod lemmatizer;
pub mod reconciler;
pub mod speller;
pub mod statistics;
pub mod upstream;
