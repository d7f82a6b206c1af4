pub mod truco;
