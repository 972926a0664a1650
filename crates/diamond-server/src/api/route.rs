//! Route assembly

use actix_web::{Scope, web};

use super::{backup_data, dashboard, notification, session, tanda_terima, tiket};

pub fn routes() -> Scope {
    web::scope("")
        .service(
            web::scope("/tiket")
                .service(tiket::periode_data_for_ilap)
                .service(tiket::preview_nomor)
                .service(tiket::check_exists)
                .service(tiket::check_prioritas)
                .service(tiket::kirim_ke_pide)
                .service(tiket::list)
                .service(tiket::create)
                .service(tiket::detail)
                .service(tiket::rekam_hasil_penelitian)
                .service(tiket::kembalikan)
                .service(tiket::identifikasi)
                .service(tiket::transfer_ke_pmde)
                .service(tiket::selesaikan)
                .service(tiket::batalkan),
        )
        .service(
            web::scope("/backup-data")
                .service(backup_data::create)
                .service(backup_data::delete),
        )
        .service(
            web::scope("/tanda-terima")
                .service(tanda_terima::next_number)
                .service(tanda_terima::eligible_tikets)
                .service(tanda_terima::create)
                .service(tanda_terima::update)
                .service(tanda_terima::cancel),
        )
        .service(
            web::scope("/notification")
                .service(notification::unread)
                .service(notification::mark_read),
        )
        .service(web::scope("/dashboard").service(dashboard::summary))
        .service(
            web::scope("/session")
                .service(session::refresh)
                .service(session::status),
        )
}
