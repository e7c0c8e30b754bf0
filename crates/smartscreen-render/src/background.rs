//! Backgrounds for rendered regions.

use image::{imageops, RgbImage};
use smartscreen_core::{Background, Rect, RenderError};

/// Pixels of `background` covering `area` (panel coordinates)
///
/// Image backgrounds are full-screen pictures; the part under `area` is cut
/// out. Whatever the picture does not cover stays black.
pub fn background_region(background: &Background, area: Rect) -> Result<RgbImage, RenderError> {
    match background {
        Background::Color(color) => Ok(RgbImage::from_pixel(
            area.width,
            area.height,
            (*color).into(),
        )),
        Background::Image(path) => {
            let picture = image::open(path)
                .map_err(|e| RenderError::ImageLoad {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?
                .to_rgb8();
            let cropped =
                imageops::crop_imm(&picture, area.x, area.y, area.width, area.height).to_image();
            if cropped.dimensions() == (area.width, area.height) {
                return Ok(cropped);
            }
            let mut canvas = RgbImage::new(area.width, area.height);
            imageops::replace(&mut canvas, &cropped, 0, 0);
            Ok(canvas)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smartscreen_core::Rgb;

    #[test]
    fn test_color_background() {
        let region = background_region(&Background::Color(Rgb::new(1, 2, 3)), Rect::new(5, 5, 4, 2))
            .unwrap();
        assert_eq!(region.dimensions(), (4, 2));
        assert!(region.pixels().all(|p| p.0 == [1, 2, 3]));
    }

    #[test]
    fn test_image_background_is_cut_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        let mut picture = RgbImage::new(10, 10);
        picture.put_pixel(3, 4, image::Rgb([9, 9, 9]));
        picture.save(&path).unwrap();

        let region = background_region(&Background::Image(path), Rect::new(3, 4, 2, 2)).unwrap();
        assert_eq!(region.get_pixel(0, 0).0, [9, 9, 9]);
        assert_eq!(region.get_pixel(1, 1).0, [0, 0, 0]);
    }

    #[test]
    fn test_image_background_smaller_than_area() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("small.png");
        RgbImage::from_pixel(4, 4, image::Rgb([200, 0, 0])).save(&path).unwrap();

        let region = background_region(&Background::Image(path), Rect::new(2, 2, 4, 4)).unwrap();
        assert_eq!(region.dimensions(), (4, 4));
        assert_eq!(region.get_pixel(1, 1).0, [200, 0, 0]);
        assert_eq!(region.get_pixel(3, 3).0, [0, 0, 0]);
    }

    #[test]
    fn test_missing_image() {
        let err = background_region(
            &Background::Image("/nonexistent/bg.png".into()),
            Rect::new(0, 0, 1, 1),
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::ImageLoad { .. }));
    }
}
