pub mod achievement_repo;
pub mod award_repo;
pub mod projection_repo;
