//! SUNAT catalog 03 unit-of-measure codes.
//!
//! Catalog 03 is based on UN/ECE Recommendation 20; this covers the subset
//! a small business actually invoices with.

/// Check whether `code` is a known catalog 03 unit code.
pub fn is_known_unit_code(code: &str) -> bool {
    UNIT_CODES.binary_search(&code).is_ok()
}

/// Sorted for binary search.
static UNIT_CODES: &[&str] = &[
    "4A",  // Bobinas
    "BE",  // Fardo
    "BG",  // Bolsa
    "BJ",  // Balde
    "BLL", // Barriles
    "BO",  // Botellas
    "BX",  // Caja
    "CMT", // Centímetro lineal
    "CY",  // Cilindro
    "DAY", // Día
    "DZN", // Docena
    "GLL", // Galón
    "GRM", // Gramo
    "HUR", // Hora
    "KGM", // Kilogramo
    "KTM", // Kilómetro
    "KWH", // Kilovatio hora
    "LTR", // Litro
    "MIL", // Millares
    "MIN", // Minuto
    "MON", // Mes
    "MTK", // Metro cuadrado
    "MTQ", // Metro cúbico
    "MTR", // Metro
    "NIU", // Unidad (bienes)
    "PK",  // Paquete
    "PR",  // Par
    "SET", // Juego
    "TNE", // Tonelada
    "ZZ",  // Unidad (servicios)
];
