pub mod builder;
pub mod confidence;
pub mod needs;
pub mod ranker;
pub mod recommender;
pub mod retrieval;
