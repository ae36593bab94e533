//! Status overlay stamped on every streamed frame: a blinking recording LED
//! in the top-right corner and the last digit of the frame counter, so a
//! frozen stream is visually obvious.

use crate::buffer::FrameBuffer;

const LED_BRIGHT: [u8; 3] = [0, 255, 0];
const LED_DIM: [u8; 3] = [0, 120, 0];
const RING_BRIGHT: [u8; 3] = [0, 200, 0];
const RING_DIM: [u8; 3] = [0, 80, 0];
const DIGIT_COLOR: [u8; 3] = [255, 255, 0];

/// 5x8 glyphs for 0-9. Each byte is one row; the low five bits are the
/// columns, most significant of the five on the left.
const DIGITS: [[u8; 8]; 10] = [
    [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b11111],
    [0b11111, 0b00001, 0b00001, 0b11111, 0b10000, 0b10000, 0b10000, 0b11111],
    [0b11111, 0b00001, 0b00001, 0b11111, 0b00001, 0b00001, 0b00001, 0b11111],
    [0b10001, 0b10001, 0b10001, 0b11111, 0b00001, 0b00001, 0b00001, 0b00001],
    [0b11111, 0b10000, 0b10000, 0b11111, 0b00001, 0b00001, 0b00001, 0b11111],
    [0b11111, 0b10000, 0b10000, 0b11111, 0b10001, 0b10001, 0b10001, 0b11111],
    [0b11111, 0b00001, 0b00001, 0b00001, 0b00001, 0b00001, 0b00001, 0b00001],
    [0b11111, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001, 0b11111],
    [0b11111, 0b10001, 0b10001, 0b11111, 0b00001, 0b00001, 0b00001, 0b11111],
];

/// True while the LED is in the bright phase of its blink cycle.
pub fn led_on(frame_counter: u64) -> bool {
    (frame_counter / 3) % 2 == 0
}

/// Stamp the LED and frame digit onto a finished frame.
pub fn apply(buffer: &mut FrameBuffer, frame_counter: u64) {
    let width = buffer.width();
    let height = buffer.height();
    if width < 16 || height < 16 {
        return;
    }

    let on = led_on(frame_counter);
    let (core, ring) = if on {
        (LED_BRIGHT, RING_BRIGHT)
    } else {
        (LED_DIM, RING_DIM)
    };

    // Ring first, core on top.
    buffer.fill_rect(width as i32 - 10, 0, width as i32, 9, ring);
    buffer.fill_rect(width as i32 - 8, 0, width as i32, 7, core);

    draw_digit(buffer, (frame_counter % 10) as usize, width - 6, height - 8);
}

fn draw_digit(buffer: &mut FrameBuffer, digit: usize, start_x: u32, start_y: u32) {
    let glyph = &DIGITS[digit];
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..5u32 {
            if bits & (0b10000 >> col) != 0 {
                buffer.set(start_x + col, start_y + row as u32, DIGIT_COLOR);
            }
        }
    }
}
