pub mod mock_snipeit;
