pub mod walk;

pub use walk::{list_candidates, CandidateFile};
