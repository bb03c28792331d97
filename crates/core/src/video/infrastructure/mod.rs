pub mod ffmpeg_capture;
pub mod image_file_writer;
