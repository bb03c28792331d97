//! Face-following pan control.
//!
//! Frames come in from a camera, the largest detected face becomes the
//! target, and its horizontal offset from the frame center is turned into
//! `X<step>` / `CENTER` / `STOP` lines for a serial-attached pan actuator.

pub mod shared {
    pub mod constants;
    pub mod frame;
    pub mod region;
}

pub mod tracking {
    pub mod domain {
        pub mod clock;
        pub mod command;
        pub mod command_mapper;
        pub mod loss_timer;
        pub mod target_selector;
        pub mod tracking_config;
        pub mod tracking_controller;
    }
}

pub mod detection {
    pub mod domain {
        pub mod face_detector;
    }
    pub mod infrastructure;
}

pub mod actuator {
    pub mod domain {
        pub mod actuator_link;
    }
    pub mod infrastructure;
}

pub mod video {
    pub mod domain {
        pub mod frame_source;
        pub mod image_writer;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod debug_overlay;
    pub mod pipeline_logger;
    pub mod track_faces_use_case;
}
