pub mod failure;
