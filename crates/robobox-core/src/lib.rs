//! RoboBox Core - domain types for the RoboBox robotics-education platform
//!
//! This crate provides the types shared by every other RoboBox crate:
//! - Catalog, workshop and enquiry document models with form validation
//! - The scratch-to-reveal discount widget state machine and its mask surface
//! - Identity, auth session and admin routing
//! - Static grounding data (Q&A pairs) and the site search index

pub mod auth;
pub mod error;
pub mod models;
pub mod qa;
pub mod reveal;
pub mod search;
pub mod validation;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use models::{
    DiscountResult, Enquiry, EnquiryInput, EnquiryStatus, FaqAnswer, Product, ProductInput,
    QaPair, Registration, Workshop, WorkshopInput,
};
pub use validation::{Validate, ValidationError};
