pub mod intersection;
