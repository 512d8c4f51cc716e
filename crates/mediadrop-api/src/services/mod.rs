pub mod intake;

pub use intake::UploadIntake;
