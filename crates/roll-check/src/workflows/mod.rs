pub mod address;
pub mod enrolment;
