pub mod condvar_signal;
pub mod quantizer;
pub mod ring_buffer;
pub mod wave_format;
