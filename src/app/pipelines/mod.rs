pub mod card_image_pipeline;
