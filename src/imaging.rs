use std::io::Cursor;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{flat::SampleLayout, ImageBuffer, ImageOutputFormat, Pixel, RgbImage};
use ndarray::{Array3, ArrayView3, ShapeBuilder};

use crate::detection::{FaceDetectionError, FaceDetectionResult};

pub trait ToRgb8 {
    fn to_rgb8(&self) -> RgbImage;
}

impl ToRgb8 for ArrayView3<'_, u8> {
    /// Single channel frames are expanded to gray, extra channels (alpha) are dropped.
    fn to_rgb8(&self) -> RgbImage {
        let (height, width, channels) = self.dim();
        let mut image = ImageBuffer::new(width as u32, height as u32);
        if channels == 0 {
            return image;
        }

        let last = channels - 1;
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            let (x, y) = (x as usize, y as usize);
            let r = self[[y, x, 0]];
            let g = self[[y, x, 1.min(last)]];
            let b = self[[y, x, 2.min(last)]];
            *pixel = image::Rgb([r, g, b]);
        }
        image
    }
}

impl ToRgb8 for Array3<u8> {
    fn to_rgb8(&self) -> RgbImage {
        self.view().to_rgb8()
    }
}

pub trait ToArray3 {
    type Out;

    fn into_array3(self) -> Self::Out;
}

impl<P> ToArray3 for ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
{
    type Out = FaceDetectionResult<Array3<P::Subpixel>>;

    fn into_array3(self) -> Self::Out {
        let SampleLayout {
            channels,
            channel_stride,
            height,
            height_stride,
            width,
            width_stride,
        } = self.sample_layout();
        let shape = (height as usize, width as usize, channels as usize);
        let strides = (height_stride, width_stride, channel_stride);
        Array3::from_shape_vec(shape.strides(strides), self.into_raw())
            .map_err(|err| FaceDetectionError::ImageError(err.to_string()))
    }
}

/// Encodes an image as a base64 PNG string.
pub fn encode_png_base64(image: &RgbImage) -> FaceDetectionResult<String> {
    let mut png = Cursor::new(Vec::new());
    image.write_to(&mut png, ImageOutputFormat::Png)?;
    Ok(STANDARD.encode(png.into_inner()))
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;

    use super::*;

    #[test]
    fn rgb_image_round_trips_through_array() {
        let mut image = RgbImage::new(4, 3);
        image.put_pixel(3, 1, image::Rgb([10, 20, 30]));

        let array = image.clone().into_array3().unwrap();
        assert_eq!(array.dim(), (3, 4, 3));
        assert_eq!(array[[1, 3, 2]], 30);
        assert_eq!(array.to_rgb8(), image);
    }

    #[test]
    fn gray_and_rgba_frames_convert() {
        let gray = Array3::<u8>::from_elem((2, 2, 1), 77);
        assert_eq!(*gray.to_rgb8().get_pixel(1, 1), image::Rgb([77, 77, 77]));

        let mut rgba = Array3::<u8>::zeros((2, 2, 4));
        rgba[[0, 1, 0]] = 1;
        rgba[[0, 1, 2]] = 3;
        rgba[[0, 1, 3]] = 255;
        assert_eq!(*rgba.to_rgb8().get_pixel(1, 0), image::Rgb([1, 0, 3]));
    }

    #[test]
    fn encodes_frames_as_base64_png() {
        let mut frame = Array3::<u8>::zeros((3, 5, 3));
        frame[[2, 4, 1]] = 200;

        let encoded = encode_png_base64(&frame.to_rgb8()).unwrap();
        let png = STANDARD.decode(encoded).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().into_rgb8();
        assert_eq!(decoded.dimensions(), (5, 3));
        assert_eq!(*decoded.get_pixel(4, 2), image::Rgb([0, 200, 0]));
    }
}
