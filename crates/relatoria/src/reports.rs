//! Fixed report catalog. Adding a report type means adding one entry
//! here; the dispatcher and processor never change.

#[derive(Debug)]
pub struct ReportDefinition {
    pub report_type: &'static str,
    /// Parameters the task must supply, in positional bind order.
    pub required_params: &'static [&'static str],
    pub query: &'static str,
    pub csv_header: &'static [&'static str],
}

pub const CATALOG: &[ReportDefinition] = &[
    ReportDefinition {
        report_type: "GASTOS_POR_DEPARTAMENTO",
        required_params: &["departamento"],
        query: "SELECT f.nome, f.cargo, g.descricao, g.valor, g.data_gasto \
                FROM gastos_internos g \
                JOIN funcionarios f ON g.id_funcionario = f.id \
                WHERE f.departamento = ? AND g.status_aprovacao = 'Aprovado' AND f.status = 'Ativo' \
                ORDER BY g.valor DESC",
        csv_header: &["Nome", "Cargo", "Descricao_Gasto", "Valor", "Data"],
    },
    ReportDefinition {
        report_type: "PAGAMENTOS_PENDENTES",
        required_params: &[],
        query: "SELECT f.nome, f.email, f.departamento, p.mes_referencia, p.valor_pago \
                FROM pagamentos p \
                JOIN funcionarios f ON p.id_funcionario = f.id \
                WHERE p.status = 'Pendente' \
                ORDER BY f.departamento, p.mes_referencia",
        csv_header: &[
            "Nome",
            "Email",
            "Departamento",
            "Mes_Referencia",
            "Valor_Pendente",
        ],
    },
];

pub fn resolve(report_type: &str) -> Option<&'static ReportDefinition> {
    CATALOG.iter().find(|def| def.report_type == report_type)
}
