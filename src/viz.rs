use image::{GenericImage, Rgb};
use imageproc::drawing::{draw_cross_mut, draw_hollow_rect_mut, draw_line_segment_mut};

use crate::{Face, Rect};

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const LANDMARK_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const CONTOUR_COLOR: Rgb<u8> = Rgb([0, 0, 255]);

impl From<Rect> for imageproc::rect::Rect {
    fn from(rect: Rect) -> Self {
        imageproc::rect::Rect::at(rect.x.round() as i32, rect.y.round() as i32).of_size(
            (rect.width.round() as u32).max(1),
            (rect.height.round() as u32).max(1),
        )
    }
}

/// Draws normalized faces on the image: boxes, landmarks as crosses and
/// contours as connected segments.
pub fn draw_faces<I>(image: &mut I, faces: &[Face])
where
    I: GenericImage<Pixel = Rgb<u8>>,
{
    for face in faces {
        draw_hollow_rect_mut(image, face.bounds.into(), BOX_COLOR);

        for point in face.landmarks.iter().flat_map(|landmarks| landmarks.values()) {
            draw_cross_mut(
                image,
                LANDMARK_COLOR,
                point.x.round() as i32,
                point.y.round() as i32,
            );
        }

        for points in face.contours.iter().flat_map(|contours| contours.values()) {
            for segment in points.windows(2) {
                draw_line_segment_mut(
                    image,
                    (segment[0].x as f32, segment[0].y as f32),
                    (segment[1].x as f32, segment[1].y as f32),
                    CONTOUR_COLOR,
                );
            }
        }
    }
}
